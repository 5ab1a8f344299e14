//! Row-parallel iteration with or without rayon.
//!
//! With the `parallel` feature this is `rayon::prelude`. Without it (WASM,
//! single-threaded embedding) `into_par_iter()` degrades to `into_iter()`,
//! so `(0..rows).into_par_iter().flat_map(..).collect()` keeps compiling and
//! resolves to the standard `Iterator` adaptors.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
