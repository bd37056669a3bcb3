// Differentiable tensor operations, grouped by concern. Each operation
// allocates new scalar nodes and records backward edges at construction
// time; none of them needs a dedicated backward formula.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod reduction;
