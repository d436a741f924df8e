//! BMI engine: the formula, the category bands and the display color hint.
//!
//! Category bands are half-open and left-inclusive:
//! - `bmi < 18.5` → Underweight
//! - `18.5 <= bmi < 25.0` → Normal
//! - `25.0 <= bmi < 30.0` → Overweight
//! - `bmi >= 30.0` → Obesity
//!
//! Nothing here validates its input. Callers reject empty, non-numeric and
//! non-positive values first (see [`crate::input`]).

use crate::Category;

pub const NORMAL_LOWER_BOUND: f64 = 18.5;
pub const OVERWEIGHT_LOWER_BOUND: f64 = 25.0;
pub const OBESITY_LOWER_BOUND: f64 = 30.0;

/// BMI from a weight in kilograms and a height in meters
pub fn compute(weight: f64, height: f64) -> f64 {
    weight / (height * height)
}

/// Map a BMI value onto its category
pub fn classify(bmi: f64) -> Category {
    if bmi < NORMAL_LOWER_BOUND {
        Category::Underweight
    } else if bmi < OVERWEIGHT_LOWER_BOUND {
        Category::Normal
    } else if bmi < OBESITY_LOWER_BOUND {
        Category::Overweight
    } else {
        Category::Obesity
    }
}

/// Hex color token used to tint a displayed result.
///
/// Presentation only: it is never stored and never consulted by [`classify`].
pub fn display_color(category: Category) -> &'static str {
    match category {
        Category::Underweight => "#e6cd11",
        Category::Normal => "#42c740",
        Category::Overweight => "#e7520e",
        Category::Obesity => "#e57373",
    }
}

/// Result line shown after a calculation
pub fn format_result(bmi: f64, category: Category) -> String {
    format!("BMI: {:.2}  |  Category: {}", bmi, category)
}
