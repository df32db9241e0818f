//! Teacher-student knowledge distillation over shared batches.
//!
//! A trained teacher model and a student model score the same positive and
//! negative candidates; the student is trained (externally) to match the
//! teacher's score distribution. Both models must expose the
//! [`ScoringModel`] interface and agree on the entity and relation
//! catalogs, while their variant and hidden dimension are free to differ —
//! a large RotatE teacher can distil into a small TransE student.
//!
//! The loss is the mean row-wise KL divergence between temperature-softened
//! softmax distributions over each row's `[positive | negatives]` scores.

use crate::batch::Batch;
use crate::embedding::Embeddings;
use crate::error::{Error, Result};
use crate::models::ScoringModel;
use crate::sampling::NegativeSet;
use ndarray::Array2;

/// Distillation loss over teacher and student score distributions.
#[derive(Debug, Clone)]
pub struct Distiller {
    temperature: f32,
}

impl Distiller {
    /// Create a distiller with the given softmax temperature.
    ///
    /// Higher temperatures soften both distributions, exposing more of the
    /// teacher's ranking structure over low-scored candidates.
    pub fn new(temperature: f32) -> Result<Self> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(Error::Config(format!(
                "temperature must be positive and finite, got {temperature}"
            )));
        }
        Ok(Self { temperature })
    }

    /// Softmax temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Mean row-wise KL(teacher ‖ student) between softened distributions.
    pub fn loss(&self, teacher_scores: &Array2<f32>, student_scores: &Array2<f32>) -> Result<f32> {
        if teacher_scores.dim() != student_scores.dim() {
            return Err(Error::DimensionMismatch(format!(
                "teacher scores are {:?}, student scores are {:?}",
                teacher_scores.dim(),
                student_scores.dim()
            )));
        }
        let (rows, columns) = teacher_scores.dim();
        if rows == 0 || columns == 0 {
            return Err(Error::EmptyDataset("no scores to distil".into()));
        }

        let mut total = 0.0;
        for row in 0..rows {
            let teacher_log = log_softmax(teacher_scores.row(row), self.temperature);
            let student_log = log_softmax(student_scores.row(row), self.temperature);
            for i in 0..columns {
                let p = teacher_log[i].exp();
                total += p * (teacher_log[i] - student_log[i]);
            }
        }
        Ok(total / rows as f32)
    }

    /// Score a shared batch with both models and return the loss.
    ///
    /// Column 0 of each score matrix holds the positive triple's score, the
    /// remaining columns the negatives.
    pub fn step(
        &self,
        teacher: &dyn ScoringModel,
        teacher_emb: &Embeddings,
        student: &dyn ScoringModel,
        student_emb: &Embeddings,
        batch: &Batch,
        negatives: &NegativeSet,
    ) -> Result<f32> {
        teacher.validate(teacher_emb)?;
        student.validate(student_emb)?;

        let t = teacher.config();
        let s = student.config();
        if t.n_entity != s.n_entity || t.n_relation != s.n_relation {
            return Err(Error::Config(format!(
                "teacher ({} entities, {} relations) and student ({} entities, {} relations) \
                 must share the same catalogs",
                t.n_entity, t.n_relation, s.n_entity, s.n_relation
            )));
        }

        let teacher_scores = stack_scores(teacher, teacher_emb, batch, negatives);
        let student_scores = stack_scores(student, student_emb, batch, negatives);
        self.loss(&teacher_scores, &student_scores)
    }
}

/// `[positive | negatives]` score matrix for one model.
fn stack_scores(
    model: &dyn ScoringModel,
    emb: &Embeddings,
    batch: &Batch,
    negatives: &NegativeSet,
) -> Array2<f32> {
    let positive = model.score_positive(emb, batch);
    let negative = model.score_negatives(emb, batch, negatives);

    let mut scores = Array2::zeros((batch.len(), 1 + negatives.n_negative()));
    for row in 0..batch.len() {
        scores[[row, 0]] = positive[row];
        for column in 0..negatives.n_negative() {
            scores[[row, column + 1]] = negative[[row, column]];
        }
    }
    scores
}

/// Numerically stable log-softmax of one score row at a temperature.
fn log_softmax(scores: ndarray::ArrayView1<'_, f32>, temperature: f32) -> Vec<f32> {
    let scaled: Vec<f32> = scores.iter().map(|&s| s / temperature).collect();
    let max = scaled.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let log_sum: f32 = scaled.iter().map(|&s| (s - max).exp()).sum::<f32>().ln();
    scaled.iter().map(|&s| s - max - log_sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Mode;
    use crate::index::TripleIndex;
    use crate::models::{ModelConfig, DistMult, TransE};
    use crate::sampling::{NegativeSampler, SamplerConfig};
    use crate::triple::Triple;
    use ndarray::arr2;

    #[test]
    fn test_invalid_temperature_rejected() {
        assert!(matches!(Distiller::new(0.0), Err(Error::Config(_))));
        assert!(matches!(Distiller::new(-1.0), Err(Error::Config(_))));
        assert!(matches!(Distiller::new(f32::NAN), Err(Error::Config(_))));
        assert!(Distiller::new(1.0).is_ok());
    }

    #[test]
    fn test_identical_distributions_have_zero_loss() {
        let distiller = Distiller::new(1.0).unwrap();
        let scores = arr2(&[[1.0, 0.5, -0.5], [0.0, 2.0, 1.0]]);

        let loss = distiller.loss(&scores, &scores.clone()).unwrap();
        assert!(loss.abs() < 1e-6);
    }

    #[test]
    fn test_diverging_distributions_have_positive_loss() {
        let distiller = Distiller::new(1.0).unwrap();
        let teacher = arr2(&[[2.0, 0.0, 0.0]]);
        let student = arr2(&[[0.0, 0.0, 2.0]]);

        let loss = distiller.loss(&teacher, &student).unwrap();
        assert!(loss > 0.1);
    }

    #[test]
    fn test_shift_invariance_of_loss() {
        // Softmax is shift-invariant, so adding a constant to every score
        // of either model leaves the loss unchanged.
        let distiller = Distiller::new(2.0).unwrap();
        let teacher = arr2(&[[1.0, 0.5, -0.5]]);
        let student = arr2(&[[0.3, 0.9, 0.1]]);
        let shifted = student.mapv(|s| s + 10.0);

        let a = distiller.loss(&teacher, &student).unwrap();
        let b = distiller.loss(&teacher, &shifted).unwrap();
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let distiller = Distiller::new(1.0).unwrap();
        let teacher = arr2(&[[1.0, 0.5]]);
        let student = arr2(&[[1.0, 0.5, 0.0]]);

        assert!(matches!(
            distiller.loss(&teacher, &student),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_step_over_shared_batch() {
        let triples = vec![
            Triple::new(0, 0, 2),
            Triple::new(1, 0, 2),
            Triple::new(2, 1, 3),
        ];
        let index = TripleIndex::build(&triples, 6, 2).unwrap();

        // A wider teacher distils into a narrower student of a different
        // variant; only the catalogs must agree.
        let teacher = DistMult::new(ModelConfig::new(6, 2, 8, 4.0).unwrap());
        let student = TransE::new(ModelConfig::new(6, 2, 4, 4.0).unwrap());
        let teacher_emb = Embeddings::for_model(&teacher, 1).unwrap();
        let student_emb = Embeddings::for_model(&student, 2).unwrap();

        let batch = Batch {
            triples,
            weights: vec![1.0; 3],
            mode: Mode::CorruptTail,
        };
        let mut sampler =
            NegativeSampler::new(&index, SamplerConfig::default().with_n_negative(4)).unwrap();
        let negatives = sampler.generate(&batch);

        let distiller = Distiller::new(1.0).unwrap();
        let loss = distiller
            .step(
                &teacher,
                &teacher_emb,
                &student,
                &student_emb,
                &batch,
                &negatives,
            )
            .unwrap();
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_step_rejects_mismatched_catalogs() {
        let teacher = TransE::new(ModelConfig::new(6, 2, 4, 4.0).unwrap());
        let student = TransE::new(ModelConfig::new(5, 2, 4, 4.0).unwrap());
        let teacher_emb = Embeddings::for_model(&teacher, 1).unwrap();
        let student_emb = Embeddings::for_model(&student, 2).unwrap();

        let triples = vec![Triple::new(0, 0, 2)];
        let index = TripleIndex::build(&triples, 5, 2).unwrap();
        let batch = Batch {
            triples,
            weights: vec![1.0],
            mode: Mode::CorruptTail,
        };
        let mut sampler = NegativeSampler::new(&index, SamplerConfig::default()).unwrap();
        let negatives = sampler.generate(&batch);

        let distiller = Distiller::new(1.0).unwrap();
        assert!(matches!(
            distiller.step(
                &teacher,
                &teacher_emb,
                &student,
                &student_emb,
                &batch,
                &negatives,
            ),
            Err(Error::Config(_))
        ));
    }
}
