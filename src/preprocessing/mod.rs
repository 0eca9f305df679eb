//! Feature preprocessing: scaling, one-hot encoding and their composition

pub mod encoder;
pub mod scaler;
pub mod transformer;

pub use encoder::OneHotEncoder;
pub use scaler::StandardScaler;
pub use transformer::ColumnTransformer;
