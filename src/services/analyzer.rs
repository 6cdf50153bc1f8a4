use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// What an analyzer thinks is on the plate, per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    /// 0–100
    pub confidence: f64,
}

#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> AppResult<Detection>;

    /// Short label surfaced in API responses.
    fn label(&self) -> &'static str;
}

/// Picks a detection at random from a fixed list. Stands in until a real
/// vision model is wired behind [`FoodAnalyzer`].
pub struct RandomChoiceAnalyzer {
    candidates: Vec<Detection>,
}

impl RandomChoiceAnalyzer {
    pub fn new(candidates: Vec<Detection>) -> Self {
        Self { candidates }
    }
}

impl Default for RandomChoiceAnalyzer {
    fn default() -> Self {
        let d = |name: &str, calories, protein, carbs, fats, confidence| Detection {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fats,
            confidence,
        };
        Self::new(vec![
            d("Grilled Chicken Breast", 165.0, 31.0, 0.0, 3.6, 92.0),
            d("Brown Rice", 112.0, 2.6, 24.0, 0.9, 88.0),
            d("Caesar Salad", 184.0, 7.0, 10.0, 14.0, 85.0),
            d("Banana", 89.0, 1.1, 23.0, 0.3, 95.0),
            d("Scrambled Eggs", 148.0, 10.0, 1.2, 11.0, 90.0),
            d("Oatmeal", 68.0, 2.4, 12.0, 1.4, 87.0),
        ])
    }
}

#[async_trait]
impl FoodAnalyzer for RandomChoiceAnalyzer {
    async fn analyze(&self, image: &[u8]) -> AppResult<Detection> {
        if image.is_empty() {
            return Err(AppError::Validation("No image uploaded".into()));
        }
        self.candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Analyzer has no candidates")))
    }

    fn label(&self) -> &'static str {
        "Mock AI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detection_comes_from_candidate_list() {
        let analyzer = RandomChoiceAnalyzer::default();
        let detection = analyzer.analyze(b"\xff\xd8\xff").await.unwrap();
        assert!(analyzer.candidates.contains(&detection));
        assert!((0.0..=100.0).contains(&detection.confidence));
    }

    #[tokio::test]
    async fn test_single_candidate_is_deterministic() {
        let only = Detection {
            name: "Apple".into(),
            calories: 52.0,
            protein: 0.3,
            carbs: 14.0,
            fats: 0.2,
            confidence: 99.0,
        };
        let analyzer = RandomChoiceAnalyzer::new(vec![only.clone()]);
        assert_eq!(analyzer.analyze(b"img").await.unwrap(), only);
    }

    #[tokio::test]
    async fn test_empty_image_rejected() {
        let analyzer = RandomChoiceAnalyzer::default();
        assert!(analyzer.analyze(&[]).await.is_err());
    }
}
