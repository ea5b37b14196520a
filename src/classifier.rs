//! Trend classification of a single month sequence.
//!
//! Rules are evaluated top-down and the first match wins. Every rule only
//! sees the sequence it is given, so rows can be classified in any order.

use crate::error::InvalidInput;
use crate::models::{Classification, Status};

/// Shortest sequence the trailing-window rules can read.
pub const MIN_PERIODS: usize = 3;

/// A validated sequence with its trailing window already indexed.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub values: &'a [f64],
    pub last: f64,
    pub prev: f64,
    pub prev2: f64,
}

impl<'a> Window<'a> {
    fn new(values: &'a [f64]) -> Option<Self> {
        match values {
            [.., prev2, prev, last] => Some(Self {
                values,
                last: *last,
                prev: *prev,
                prev2: *prev2,
            }),
            _ => None,
        }
    }
}

pub struct Rule {
    pub status: Status,
    pub applies: fn(&Window) -> bool,
}

pub const RULES: [Rule; 6] = [
    Rule {
        status: Status::New,
        applies: is_new,
    },
    Rule {
        status: Status::MissingLatest,
        applies: is_missing_latest,
    },
    Rule {
        status: Status::Stopped,
        applies: is_stopped,
    },
    Rule {
        status: Status::Growth,
        applies: is_growth,
    },
    Rule {
        status: Status::Decline,
        applies: is_decline,
    },
    Rule {
        status: Status::Irregular,
        applies: is_irregular,
    },
];

pub fn classify(values: &[f64]) -> Result<Classification, InvalidInput> {
    validate(values)?;

    let Some(window) = Window::new(values) else {
        return Ok(Classification::of(Status::InsufficientData));
    };

    let status = RULES
        .iter()
        .find(|rule| (rule.applies)(&window))
        .map(|rule| rule.status)
        .unwrap_or(Status::Stable);

    let last_active = match status {
        Status::Stopped => last_active_period(values),
        _ => None,
    };

    Ok(Classification {
        status,
        last_active,
    })
}

pub fn validate(values: &[f64]) -> Result<(), InvalidInput> {
    if values.is_empty() {
        return Err(InvalidInput::Empty);
    }

    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(InvalidInput::NonFinite { index });
        }
        if value < 0.0 {
            return Err(InvalidInput::Negative { index, value });
        }
    }

    Ok(())
}

/// Newest period index with a positive value.
pub fn last_active_period(values: &[f64]) -> Option<usize> {
    values.iter().rposition(|&value| value > 0.0)
}

fn is_new(w: &Window) -> bool {
    let (head, tail) = w.values.split_at(w.values.len() / 2);
    head.iter().sum::<f64>() == 0.0 && tail.iter().sum::<f64>() > 0.0
}

fn is_missing_latest(w: &Window) -> bool {
    w.last == 0.0 && w.prev > 0.0
}

fn is_stopped(w: &Window) -> bool {
    w.last == 0.0 && w.prev == 0.0
}

fn is_growth(w: &Window) -> bool {
    w.last > w.prev && w.prev > w.prev2 && w.prev2 > 0.0
}

fn is_decline(w: &Window) -> bool {
    w.last < w.prev && w.prev < w.prev2 && w.last > 0.0
}

// Gap strictly between the first and last active periods.
fn is_irregular(w: &Window) -> bool {
    let first = w.values.iter().position(|&v| v > 0.0);
    let last = last_active_period(w.values);
    match (first, last) {
        (Some(first), Some(last)) if first < last => {
            w.values[first + 1..last].iter().any(|&v| v == 0.0)
        }
        _ => false,
    }
}
