// Every training run owns its RNG, so concurrent runs never share sampling state. A fixed seed
// reproduces both the trunk initialisation and the action samples, otherwise we seed from the OS.

use rand::{SeedableRng, rngs::StdRng};

pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
