use serde::Serialize;

use crate::services::nutrition::round_half_up;

/// Nutrition per 100 g of a food.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Per100g {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Absolute nutrition snapshot stored on a diet entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryNutrition {
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

fn one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Calories round to whole kcal, macros to one decimal.
pub fn scale(food: &Per100g, quantity_g: f64) -> EntryNutrition {
    let multiplier = quantity_g / 100.0;
    EntryNutrition {
        calories: round_half_up(food.calories * multiplier) as i32,
        protein: one_decimal(food.protein * multiplier),
        carbs: one_decimal(food.carbs * multiplier),
        fats: one_decimal(food.fats * multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANANA: Per100g = Per100g {
        calories: 89.0,
        protein: 1.1,
        carbs: 23.0,
        fats: 0.3,
    };

    #[test]
    fn test_scale_quarter_kilo() {
        let food = Per100g {
            calories: 100.0,
            protein: 10.0,
            carbs: 0.0,
            fats: 0.0,
        };
        let n = scale(&food, 250.0);
        assert_eq!(n.calories, 250);
        assert_eq!(n.protein, 25.0);
    }

    #[test]
    fn test_scale_rounds_macros_to_one_decimal() {
        let n = scale(&BANANA, 118.0);
        assert_eq!(n.calories, 105); // 105.02
        assert_eq!(n.protein, 1.3); // 1.298
        assert_eq!(n.carbs, 27.1); // 27.14
        assert_eq!(n.fats, 0.4); // 0.354
    }

    #[test]
    fn test_doubling_quantity_doubles_nutrition() {
        let single = scale(&BANANA, 150.0);
        let double = scale(&BANANA, 300.0);
        assert!((double.calories - 2 * single.calories).abs() <= 1);
        assert!((double.protein - 2.0 * single.protein).abs() <= 0.1 + 1e-9);
        assert!((double.carbs - 2.0 * single.carbs).abs() <= 0.1 + 1e-9);
        assert!((double.fats - 2.0 * single.fats).abs() <= 0.1 + 1e-9);
    }

    #[test]
    fn test_zero_quantity() {
        let n = scale(&BANANA, 0.0);
        assert_eq!(n.calories, 0);
        assert_eq!(n.protein, 0.0);
    }
}
