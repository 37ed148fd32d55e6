//! Breakpoints for pausing simulation.
//!
//! A [`Breakpoint`] added to the [`Simulator`]'s breakpoint set pauses a run
//! once the PC arrives at a given instruction, before that instruction executes.
//! Running again resumes from there.
use super::Simulator;

/// A location to pause at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    /// Pause when the PC reaches the given instruction index.
    PC(usize),

    /// Pause when the PC reaches the instruction a label is bound to.
    ///
    /// This never pauses if the label does not exist in the loaded program.
    Label(String),
}

impl Breakpoint {
    /// Checks whether the simulator is currently at this breakpoint.
    pub fn check(&self, sim: &Simulator) -> bool {
        self.index(sim) == Some(sim.pc)
    }

    /// The instruction index this breakpoint refers to in the simulator's loaded program.
    pub fn index(&self, sim: &Simulator) -> Option<usize> {
        match self {
            Breakpoint::PC(pc) => Some(*pc),
            Breakpoint::Label(label) => sim.program().labels().lookup(label),
        }
    }
}
impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breakpoint::PC(pc) => write!(f, "PC {pc}"),
            Breakpoint::Label(label) => write!(f, "{label}:"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Breakpoint;
    use crate::parse::parse_program;
    use crate::sim::Simulator;

    #[test]
    fn test_check() {
        let mut sim = Simulator::default();
        sim.load_program(&parse_program("program = [\nLI x1, 1\nmid:\nLI x2, 2\n]"));

        let at_mid = Breakpoint::Label("mid".to_string());
        let missing = Breakpoint::Label("missing".to_string());
        assert_eq!(at_mid.index(&sim), Some(1));
        assert_eq!(missing.index(&sim), None);

        assert!(Breakpoint::PC(0).check(&sim));
        assert!(!at_mid.check(&sim));

        sim.step_in().unwrap();
        assert!(!Breakpoint::PC(0).check(&sim));
        assert!(at_mid.check(&sim));
        assert!(!missing.check(&sim));
    }

    #[test]
    fn test_display() {
        assert_eq!(Breakpoint::PC(3).to_string(), "PC 3");
        assert_eq!(Breakpoint::Label("loop".to_string()).to_string(), "loop:");
    }
}
