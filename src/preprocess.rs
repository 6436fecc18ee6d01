/// Lazy iterator over the logical lines of a SPICE netlist.
///
/// Physical lines starting with `+` are continuations and get appended to the
/// line before them. Every logical line comes out trimmed and upper-cased.
/// Only ASCII letters are upper-cased so that suffixes like `µ` survive.
pub struct LogicalLines<'a> {
    lines: std::str::Lines<'a>,
    current: String,
    done: bool,
}

impl<'a> LogicalLines<'a> {
    pub fn new(content: &'a str) -> Self {
        LogicalLines {
            lines: content.lines(),
            current: String::new(),
            done: false,
        }
    }

    fn flush(&mut self, seed: String) -> Option<String> {
        let line = std::mem::replace(&mut self.current, seed);
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        while let Some(raw) = self.lines.next() {
            let line = raw.trim().to_ascii_uppercase();

            if let Some(rest) = line.strip_prefix('+') {
                let rest = rest.trim();
                if !rest.is_empty() {
                    self.current.push(' ');
                    self.current.push_str(rest);
                }
                continue;
            }

            if let Some(flushed) = self.flush(line) {
                return Some(flushed);
            }
        }

        // Don't forget the last line
        self.done = true;
        self.flush(String::new())
    }
}

/// Split a buffer into logical lines.
pub fn logical_lines(content: &str) -> LogicalLines<'_> {
    LogicalLines::new(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_and_trim() {
        let lines: Vec<String> = logical_lines("  r1 1 0 4.7k  \nc1 1 0 10u\n").collect();
        assert_eq!(lines, vec!["R1 1 0 4.7K", "C1 1 0 10U"]);
    }

    #[test]
    fn test_continuation_lines() {
        let content = "Q1 1 2\n+ 3 BC547\n+   \nR1 1 0\n+4.7K";
        let lines: Vec<String> = logical_lines(content).collect();
        assert_eq!(lines, vec!["Q1 1 2 3 BC547", "R1 1 0 4.7K"]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let lines: Vec<String> = logical_lines("\n\nR1 1 0 1\n\r\n\n").collect();
        assert_eq!(lines, vec!["R1 1 0 1"]);
    }

    #[test]
    fn test_micro_sign_survives() {
        let lines: Vec<String> = logical_lines("c1 1 0 10µ").collect();
        assert_eq!(lines, vec!["C1 1 0 10µ"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(logical_lines("").count(), 0);
    }

    #[test]
    fn test_is_lazy_and_fused() {
        let mut lines = logical_lines("* first\n* second");
        assert_eq!(lines.next().as_deref(), Some("* FIRST"));
        assert_eq!(lines.next().as_deref(), Some("* SECOND"));
        assert_eq!(lines.next(), None);
        assert_eq!(lines.next(), None);
    }
}
