//! Utilities.
use anyhow::Result;
use candle_core::{backprop::GradStore, Tensor, Var};

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the  output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// Returns the L2 norm of the gradients of `vars`, as if they were concatenated.
///
/// Variables without gradient are ignored.
pub fn grad_norm(vars: &[Var], grads: &GradStore) -> Result<f32> {
    let mut sq = 0f32;
    for var in vars {
        if let Some(g) = grads.get(var.as_tensor()) {
            sq += g.sqr()?.sum_all()?.to_scalar::<f32>()?;
        }
    }
    Ok(sq.sqrt())
}

/// Rescales the gradients of `vars` so that their total norm does not exceed `max_norm`.
///
/// Returns the norm before rescaling. Gradients are left untouched if the norm is not
/// finite.
pub fn clip_grad_norm(vars: &[Var], grads: &mut GradStore, max_norm: f64) -> Result<f32> {
    let norm = grad_norm(vars, grads)?;

    if norm.is_finite() && norm as f64 > max_norm {
        let scale = max_norm / (norm as f64 + 1e-6);
        for var in vars {
            let g = match grads.get(var.as_tensor()) {
                Some(g) => g.affine(scale, 0.)?,
                None => continue,
            };
            grads.insert(var.as_tensor(), g);
        }
    }

    Ok(norm)
}

/// Concatenates tensors along the batch dimension.
pub fn cat_batch(xs: Vec<Tensor>) -> Result<Tensor> {
    anyhow::ensure!(!xs.is_empty(), "Empty batch");
    Ok(Tensor::cat(&xs, 0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_clip_grad_norm() -> Result<()> {
        let w1 = Var::from_slice(&[1f32, 2.0], (2,), &Device::Cpu)?;
        let w2 = Var::zeros((1,), DType::F32, &Device::Cpu)?;
        let loss = ((w1.as_tensor() * 30.0)?.sum_all()? + (w2.as_tensor() * 40.0)?.sum_all()?)?;
        let mut grads = loss.backward()?;
        let vars = vec![w1, w2];

        // Gradients are [30, 30] and [40].
        let norm = clip_grad_norm(&vars, &mut grads, 0.5)?;
        assert!((norm - 3400f32.sqrt()).abs() < 1e-3);
        assert!((grad_norm(&vars, &grads)? - 0.5).abs() < 1e-4);

        // No rescaling below the bound.
        let norm = clip_grad_norm(&vars, &mut grads, 1.0)?;
        assert!((norm - 0.5).abs() < 1e-4);
        assert!((grad_norm(&vars, &grads)? - 0.5).abs() < 1e-4);
        Ok(())
    }
}
