pub mod scalar;
pub mod tensor;
