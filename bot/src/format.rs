//! Magnitude-adaptive number formatting for chat rendering.
//!
//! Amounts span nine-plus orders of magnitude (a ruble price of a satoshi
//! to a ruble price of a bitcoin), so one fixed precision either drowns
//! large numbers in decimals or collapses small ones to zero. Precision
//! adapts to magnitude instead.

/// Format an amount for display: grouped thousands and two decimals above
/// a million, up to four decimals with trailing zeros trimmed down to 1,
/// six decimals down to 0.0001, ten below that.
pub fn fmt_amount(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }

    if n >= 1_000_000.0 {
        return group_thousands(&format!("{:.2}", n));
    }

    if n >= 1.0 {
        return trim_zeros(&group_thousands(&format!("{:.4}", n)));
    }

    if n >= 0.0001 {
        return trim_zeros(&format!("{:.6}", n));
    }

    trim_zeros(&format!("{:.10}", n))
}

/// Dollar price tag: grouped cents for prices from $1 up, six decimals
/// below that so sub-cent assets stay readable.
pub fn fmt_usd_price(price: f64) -> String {
    if price >= 1.0 {
        format!("${}", group_thousands(&format!("{:.2}", price)))
    } else {
        format!("${:.6}", price)
    }
}

/// Insert thousands separators into the integer part of an already
/// formatted number.
fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted, None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn trim_zeros(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }

    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
