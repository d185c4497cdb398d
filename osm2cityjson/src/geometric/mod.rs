pub mod buffer;
pub mod road;
