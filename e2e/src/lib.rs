//! End-to-end tests of the me3 server against mocked remote services.

#[cfg(test)]
mod tests;
