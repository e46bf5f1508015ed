//! Per-statistic output formatters.
//!
//! Each [`Statistic`](super::statistic::Statistic) carries a small list of
//! printers chosen when it's registered; the reporter prints every
//! registered statistic by rendering its printers in order and
//! concatenating them.

use super::statistic::Statistic;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Printer {
    Count,
    Average,
    Min,
    Max,
    Quantile(f32),
}

impl Printer {
    pub fn render(self, stat: &Statistic) -> String {
        match self {
            Printer::Count => format!("Count: {} ", stat.count()),
            Printer::Average => format!("Avg: {} ", stat.average()),
            Printer::Min => format!("Min: {} ", stat.min_or_zero()),
            Printer::Max => format!("Max: {} ", stat.max_or_zero()),
            Printer::Quantile(q) => format!("{:.3}th: {:.3} ", q, stat.quantile(q)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::statistic::Statistic;

    #[test]
    fn count_printer_formats_as_integer() {
        let mut s = Statistic::new("x", false, vec![Printer::Count]);
        s.add(1.0).unwrap();
        s.add(2.0).unwrap();
        assert_eq!(Printer::Count.render(&s), "Count: 2 ");
    }

    #[test]
    fn quantile_printer_formats_with_three_decimals() {
        let mut s = Statistic::new("latency", false, vec![]);
        for v in [1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0, 3.0] {
            s.add(v).unwrap();
        }
        let rendered = Printer::Quantile(0.5).render(&s);
        assert!(rendered.starts_with("0.500th: "));
    }
}
