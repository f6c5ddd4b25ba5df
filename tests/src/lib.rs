//! End to end tests for the zeroalloc analyzer and its `Array.Empty<T>()` fix.

#[cfg(test)]
mod analysis;
#[cfg(test)]
mod fixes;
#[cfg(test)]
mod syntax;
#[cfg(test)]
mod utils;
