use crate::db::store::Store;
use crate::error::AppResult;
use crate::models::food::{FoodCategory, NewFood};

type Row = (&'static str, FoodCategory, f64, f64, f64, f64, f64);

/// Shared catalogue: name, category, then kcal/protein/carbs/fats/fiber per 100 g.
const DEFAULT_FOODS: &[Row] = &[
    ("Oatmeal", FoodCategory::Breakfast, 68.0, 2.4, 12.0, 1.4, 1.7),
    ("Scrambled Eggs", FoodCategory::Breakfast, 148.0, 10.0, 1.2, 11.0, 0.0),
    ("Whole Wheat Toast", FoodCategory::Breakfast, 247.0, 13.0, 41.0, 3.4, 6.0),
    ("Greek Yogurt", FoodCategory::Breakfast, 59.0, 10.0, 3.6, 0.4, 0.0),
    ("Banana", FoodCategory::Breakfast, 89.0, 1.1, 23.0, 0.3, 2.6),
    ("Avocado Toast", FoodCategory::Breakfast, 160.0, 2.0, 9.0, 15.0, 7.0),
    ("Pancakes", FoodCategory::Breakfast, 227.0, 6.0, 28.0, 10.0, 1.0),
    ("Grilled Chicken Breast", FoodCategory::Lunch, 165.0, 31.0, 0.0, 3.6, 0.0),
    ("Brown Rice", FoodCategory::Lunch, 112.0, 2.6, 24.0, 0.9, 1.8),
    ("Quinoa", FoodCategory::Lunch, 120.0, 4.4, 21.0, 1.9, 2.8),
    ("Caesar Salad", FoodCategory::Lunch, 184.0, 7.0, 10.0, 14.0, 2.0),
    ("Salmon Fillet", FoodCategory::Lunch, 206.0, 22.0, 0.0, 13.0, 0.0),
    ("Pasta (Cooked)", FoodCategory::Lunch, 131.0, 5.0, 25.0, 1.1, 1.8),
    ("Chicken Sandwich", FoodCategory::Lunch, 260.0, 18.0, 30.0, 8.0, 2.0),
    ("Apple", FoodCategory::Snacks, 52.0, 0.3, 14.0, 0.2, 2.4),
    ("Almonds", FoodCategory::Snacks, 579.0, 21.0, 22.0, 50.0, 12.0),
    ("Protein Bar", FoodCategory::Snacks, 200.0, 20.0, 22.0, 6.0, 3.0),
    ("Hummus", FoodCategory::Snacks, 166.0, 8.0, 14.0, 10.0, 6.0),
    ("Carrot Sticks", FoodCategory::Snacks, 41.0, 0.9, 10.0, 0.2, 2.8),
    ("Mixed Nuts", FoodCategory::Snacks, 607.0, 20.0, 21.0, 54.0, 7.0),
    ("Dark Chocolate", FoodCategory::Snacks, 598.0, 8.0, 46.0, 43.0, 11.0),
    ("Grilled Steak", FoodCategory::Dinner, 271.0, 25.0, 0.0, 19.0, 0.0),
    ("Baked Potato", FoodCategory::Dinner, 93.0, 2.5, 21.0, 0.1, 2.2),
    ("Steamed Broccoli", FoodCategory::Dinner, 34.0, 2.8, 7.0, 0.4, 2.6),
    ("Grilled Fish", FoodCategory::Dinner, 136.0, 29.0, 0.0, 1.7, 0.0),
    ("Sweet Potato", FoodCategory::Dinner, 86.0, 1.6, 20.0, 0.1, 3.0),
    ("Chicken Curry", FoodCategory::Dinner, 180.0, 15.0, 8.0, 10.0, 2.0),
    ("Vegetable Stir Fry", FoodCategory::Dinner, 120.0, 4.0, 15.0, 5.0, 4.0),
    ("White Rice", FoodCategory::Other, 130.0, 2.7, 28.0, 0.3, 0.4),
    ("Chicken Nuggets", FoodCategory::Other, 296.0, 15.0, 18.0, 18.0, 1.0),
    ("Pizza Slice", FoodCategory::Other, 285.0, 12.0, 36.0, 10.0, 2.5),
    ("Burger", FoodCategory::Other, 354.0, 20.0, 30.0, 17.0, 2.0),
    ("French Fries", FoodCategory::Other, 312.0, 3.4, 41.0, 15.0, 3.8),
    ("Ice Cream", FoodCategory::Other, 207.0, 3.5, 24.0, 11.0, 0.7),
    ("Orange Juice", FoodCategory::Other, 45.0, 0.7, 10.0, 0.2, 0.2),
    ("Milk (Whole)", FoodCategory::Other, 61.0, 3.2, 4.8, 3.3, 0.0),
    ("Protein Shake", FoodCategory::Other, 120.0, 25.0, 3.0, 1.5, 0.0),
    ("Peanut Butter", FoodCategory::Other, 588.0, 25.0, 20.0, 50.0, 6.0),
    ("Bread (White)", FoodCategory::Other, 265.0, 9.0, 49.0, 3.2, 2.7),
    ("Cheese", FoodCategory::Other, 402.0, 25.0, 1.3, 33.0, 0.0),
    ("Tomato", FoodCategory::Other, 18.0, 0.9, 3.9, 0.2, 1.2),
];

pub fn default_foods() -> Vec<NewFood> {
    DEFAULT_FOODS
        .iter()
        .map(|(name, category, calories, protein, carbs, fats, fiber)| NewFood {
            name: (*name).to_string(),
            category: category.clone(),
            calories: *calories,
            protein: *protein,
            carbs: *carbs,
            fats: *fats,
            fiber: *fiber,
            owner: None,
        })
        .collect()
}

/// Inserts the shared catalogue unless some default food already exists.
/// Returns how many foods were inserted.
pub async fn seed_default_foods(store: &dyn Store) -> AppResult<usize> {
    if store.count_default_foods().await? > 0 {
        return Ok(0);
    }
    let foods = default_foods();
    let count = foods.len();
    for food in foods {
        store.insert_food(food).await?;
    }
    tracing::info!(count, "Seeded default foods");
    Ok(count)
}
