//! ONNX Runtime sentiment classifier for RoBERTa-style three-class models.
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`. The
//! classifier head is expected to emit logits ordered negative, neutral,
//! positive (as in `twitter-roberta-base-sentiment-latest`).

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::{Polarity, SentimentModel};

const MAX_TOKENS: usize = 512;

/// Three-class sentiment model backed by ONNX Runtime.
pub struct OnnxSentiment {
    name: String,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxSentiment {
    /// Load a model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx-sentiment".to_string());

        info!(model = %model_path.display(), "loaded sentiment model");
        Ok(Self {
            name,
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Class probabilities for one text.
    pub fn classify(&self, text: &str) -> anyhow::Result<Polarity> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("sentiment session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
        ])?;

        // Logits: [1, 3].
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1 && dims[1] == 3 && logits.len() == 3,
            "unexpected output shape: {dims:?}, expected [1, 3]"
        );

        let polarity = Polarity::from_logits([logits[0], logits[1], logits[2]]);
        debug!(
            negative = polarity.negative,
            neutral = polarity.neutral,
            positive = polarity.positive,
            "sentiment"
        );
        Ok(polarity)
    }
}

impl SentimentModel for OnnxSentiment {
    fn name(&self) -> &str {
        &self.name
    }

    fn intensity(&self, text: &str) -> anyhow::Result<f64> {
        Ok(self.classify(text)?.intensity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("twitter-roberta-base-sentiment-latest")
    }

    fn require_model() -> PathBuf {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            panic!(
                "Model not found. Export an ONNX copy of \
                 cardiffnlp/twitter-roberta-base-sentiment-latest into \
                 models/twitter-roberta-base-sentiment-latest/"
            );
        }
        dir
    }

    #[test]
    fn load_model() {
        let dir = require_model();
        let model = OnnxSentiment::load(&dir).unwrap();
        assert_eq!(model.name(), "twitter-roberta-base-sentiment-latest");
    }

    #[test]
    fn probabilities_are_normalized() {
        let model = OnnxSentiment::load(&require_model()).unwrap();
        let p = model.classify("The meeting starts at noon.").unwrap();
        let sum = p.negative + p.neutral + p.positive;
        assert!((sum - 1.0).abs() < 1e-4, "expected unit sum, got {sum}");
    }

    #[test]
    fn charged_text_more_intense_than_neutral() {
        let model = OnnxSentiment::load(&require_model()).unwrap();
        let charged = model
            .intensity("This is an outrageous, disgusting betrayal and I hate it!")
            .unwrap();
        let neutral = model.intensity("The report was published on Tuesday.").unwrap();
        assert!(
            charged > neutral,
            "charged ({charged:.2}) should exceed neutral ({neutral:.2})"
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(OnnxSentiment::load(Path::new("/nonexistent/model")).is_err());
    }
}
