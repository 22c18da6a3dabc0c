mod deploy;
mod utils;
