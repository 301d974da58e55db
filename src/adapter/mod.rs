mod future;
mod proxy;

pub use proxy::*;

#[cfg(test)]
mod future_test;
#[cfg(test)]
mod proxy_test;
