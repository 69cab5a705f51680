//! Display formatting shared by the renderers

/// Map a dataset amount to the rupee figure shown on screen.
///
/// Demo amounts are normalised values; small ones are scaled up and large ones capped.
pub fn display_amount_inr(amount: f64) -> f64 {
    if amount < 10.0 {
        (amount * 100.0).max(500.0)
    } else if amount < 100.0 {
        amount * 200.0 + 1000.0
    } else {
        (amount * 150.0 + 5000.0).min(50000.0)
    }
}

/// `₹12,345`
pub fn format_rupees(amount: f64) -> String {
    format!("₹{}", group_thousands(amount.round().max(0.0) as u64))
}

/// `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Rate in [0, 1] as a percentage with one decimal
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Detection rate, or `n/a` when the sample held no frauds
pub fn optional_percent(rate: Option<f64>) -> String {
    rate.map(percent).unwrap_or_else(|| "n/a".to_string())
}

/// Fixed-width progress bar
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
