//! Final-state reporting.
//!
//! A [`Report`] is a snapshot of the register file, memory and counters
//! taken from a [`Simulator`]. Its `Display` implementation
//! produces the end-of-run summary printed by the command line tool.
//!
//! [`Simulator`]: super::Simulator

use crate::ast::NUM_REGS;

/// A snapshot of the simulator's final state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The value of every register, ordered by index.
    pub registers: [i64; NUM_REGS],
    /// The memory, rendered as a hex string.
    pub memory_hex: String,
    /// The number of instructions executed.
    pub instruction_count: u64,
    /// The number of cycles executed.
    pub cycle_count: u64,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Final Register State:")?;
        for (i, value) in self.registers.iter().enumerate() {
            writeln!(f, "x{i}: {value}")?;
        }
        writeln!(f)?;
        writeln!(f, "Final Memory State: {}", self.memory_hex)?;
        writeln!(f)?;
        writeln!(f, "Total Instructions Executed: {}", self.instruction_count)?;
        write!(f, "Total Cycles: {}", self.cycle_count)
    }
}

#[cfg(test)]
mod tests {
    use super::Report;

    #[test]
    fn test_display() {
        let mut registers = [0; 32];
        registers[3] = 12;
        registers[31] = -1;

        let report = Report {
            registers,
            memory_hex: "00ff".to_string(),
            instruction_count: 4,
            cycle_count: 4,
        };
        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Final Register State:");
        assert_eq!(lines[1], "x0: 0");
        assert_eq!(lines[4], "x3: 12");
        assert_eq!(lines[32], "x31: -1");
        assert_eq!(lines[33], "");
        assert_eq!(lines[34], "Final Memory State: 00ff");
        assert_eq!(lines[35], "");
        assert_eq!(lines[36], "Total Instructions Executed: 4");
        assert_eq!(lines[37], "Total Cycles: 4");
        assert_eq!(lines.len(), 38);
    }
}
