//! VHDL time-literal formatting: picks the coarsest unit (down to
//! femtoseconds) that represents a simulation time exactly, falling back to
//! rounding to the nearest femtosecond if none does.

use gatery_common::Rational;

/// Formats `time_seconds` as a VHDL `WAIT FOR <n> <unit>;` literal, trying
/// `sec`, `ms`, `us`, `ns`, `ps`, `fs` in order and stopping at the first
/// unit under which the value is a whole number.
pub fn format_time(time_seconds: Rational) -> String {
    let mut time = time_seconds;
    let mut unit = "sec";
    for (next_unit, _) in [("ms", 1), ("us", 1), ("ns", 1), ("ps", 1), ("fs", 1)] {
        if time.is_integral() {
            break;
        }
        unit = next_unit;
        time = time.scale(1000);
    }
    format!("{} {unit}", time.round_to_int())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_stay_in_seconds() {
        assert_eq!(format_time(Rational::from_int(2)), "2 sec");
    }

    #[test]
    fn picks_nanoseconds_for_10ns() {
        let t = Rational::new(10, 1_000_000_000);
        assert_eq!(format_time(t), "10 ns");
    }

    #[test]
    fn picks_microseconds_for_half_microsecond() {
        let t = Rational::new(1, 2_000_000);
        assert_eq!(format_time(t), "500 ns");
    }

    #[test]
    fn falls_back_to_femtoseconds_and_rounds() {
        // One third of a femtosecond: no exact unit exists, rounds to 0 fs.
        let t = Rational::new(1, 3).divide(1_000_000_000_000_000);
        assert_eq!(format_time(t), "0 fs");
    }
}
