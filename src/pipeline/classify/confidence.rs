/// Thresholds for classification quality
pub mod classification_thresholds {
    /// At or above this the best procedure is surfaced as the answer.
    pub const ACCEPT: f64 = 0.6;

    /// Slots a fully determined problem carries.
    pub const SUFFICIENT_SLOTS: u32 = 5;
}

/// Logistic steepness around a raw score of 0.5.
const STEEPNESS: f64 = 8.0;

const CASE_KNOWN_BONUS: f64 = 0.03;

/// Map a raw ensemble score to a calibrated probability, penalizing
/// problems that carry too few slots.
pub fn calibrate(raw_score: f64, slots: u32, case_known: bool) -> f64 {
    let mut calibrated = 1.0 / (1.0 + (-STEEPNESS * (raw_score - 0.5)).exp());

    calibrated *= match slots {
        0..=2 => 0.5,
        3 => 0.75,
        4 => 0.90,
        _ => 1.0,
    };

    if case_known {
        calibrated = (calibrated + CASE_KNOWN_BONUS).min(1.0);
    }

    round2(calibrated)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
