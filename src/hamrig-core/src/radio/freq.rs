// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub fn hz(value: f64) -> f64 {
    value
}

pub fn khz(value: f64) -> f64 {
    value * 1e3
}

pub fn mhz(value: f64) -> f64 {
    value * 1e6
}

pub fn ghz(value: f64) -> f64 {
    value * 1e9
}

/// Render a frequency with the largest unit that keeps the value >= 1.
///
/// `14_074_000.0` becomes `"14.074 MHz"`, `500.0` becomes `"500 Hz"`.
pub fn format_frequency(freq_hz: f64) -> String {
    let (value, unit) = if freq_hz >= ghz(1.0) {
        (freq_hz / ghz(1.0), "GHz")
    } else if freq_hz >= mhz(1.0) {
        (freq_hz / mhz(1.0), "MHz")
    } else if freq_hz >= khz(1.0) {
        (freq_hz / khz(1.0), "kHz")
    } else {
        (freq_hz, "Hz")
    };
    format!("{value} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_helpers() {
        assert_eq!(hz(440.0), 440.0);
        assert_eq!(khz(7.1), 7100.0);
        assert_eq!(mhz(14.2), 14_200_000.0);
        assert_eq!(ghz(1.2), 1_200_000_000.0);
    }

    #[test]
    fn test_format_frequency_picks_unit() {
        assert_eq!(format_frequency(14_074_000.0), "14.074 MHz");
        assert_eq!(format_frequency(2_400_000_000.0), "2.4 GHz");
        assert_eq!(format_frequency(7_000.0), "7 kHz");
        assert_eq!(format_frequency(500.0), "500 Hz");
        assert_eq!(format_frequency(0.0), "0 Hz");
    }
}
