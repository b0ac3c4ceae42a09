pub mod abi;
pub mod client;
pub mod contract;
pub mod primitives;

#[cfg(test)]
pub mod test;
