pub mod demo;
pub mod random;
pub mod sim;

#[cfg(test)]
mod test;
