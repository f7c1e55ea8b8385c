pub mod fixed_point;
pub mod linear_math;
