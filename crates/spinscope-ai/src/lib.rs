//! Local model capabilities used to seed emotional intensity.
//!
//! The scoring engine only depends on the [`SentimentModel`] trait. The ONNX
//! Runtime implementation is compiled with the `onnx` feature.

#[cfg(feature = "onnx")]
mod sentiment;
#[cfg(feature = "onnx")]
pub use sentiment::OnnxSentiment;

/// A text classifier that yields an emotional base intensity in `[0, 100]`.
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &str;

    fn intensity(&self, text: &str) -> anyhow::Result<f64>;
}

/// Class probabilities from a three-way sentiment head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polarity {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl Polarity {
    /// Build from raw logits ordered negative, neutral, positive.
    pub fn from_logits(logits: [f32; 3]) -> Self {
        let [negative, neutral, positive] = softmax(logits);
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// Strength of the dominant non-neutral pole, scaled to `[0, 100]`.
    pub fn intensity(&self) -> f64 {
        (self.positive.max(self.negative) as f64 * 100.0).clamp(0.0, 100.0)
    }
}

fn softmax<const N: usize>(logits: [f32; N]) -> [f32; N] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = logits.map(|x| (x - max).exp());
    let sum: f32 = out.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for p in &mut out {
            *p /= sum;
        }
    }
    out
}
