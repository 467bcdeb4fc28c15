use std::sync::Once;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reductgrad_core::tensor::{randn, Tensor};
use reductgrad_core::types::Element;

static INIT_LOGGER: Once = Once::new();

/// Installs `env_logger` once for the whole test binary (`RUST_LOG=debug` to see the rules).
#[allow(dead_code)]
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// Added allow(dead_code) because usage across different test crates isn't detected easily.
#[allow(dead_code)]
pub fn create_test_tensor<T: Element>(data: Vec<T>, shape: Vec<usize>) -> Tensor<T> {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Standard-normal f64 tensor whose elements are pushed away from zero, so quotient-rule
/// and sign-based gradients stay well conditioned.
#[allow(dead_code)]
pub fn random_nonzero_tensor(shape: &[usize], rng: &mut StdRng) -> Tensor<f64> {
    let t: Tensor<f64> = randn(shape, rng).expect("randn failed");
    t.map(|x| if x.abs() < 0.25 { x.signum() * (0.25 + x.abs()) } else { x })
}

/// Shapes exercised by the property-style tests.
#[allow(dead_code)]
pub fn test_shapes() -> Vec<Vec<usize>> {
    vec![vec![5], vec![2, 3], vec![3, 1, 4], vec![2, 3, 2, 2]]
}
