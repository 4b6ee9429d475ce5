mod allocation;
mod common;
mod signals;
