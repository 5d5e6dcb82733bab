//! Dataset helpers: CSV ingestion, missing values, scaling, column
//! extraction, shuffling and train/test splitting. A dataset is a pair of matrices `(X, y)` with one
//! row per sample.

pub mod csv;
pub mod dataset;
pub mod impute;
pub mod scale;
pub mod split;
pub mod stats;

pub use csv::{load_csv, parse_csv};
pub use dataset::{features_without_column, label_column, one_hot};
pub use impute::{count_missing, fill_missing_with_mean, fill_missing_with_zeros};
pub use scale::{normalize, standardize};
pub use split::{shuffle_dataset, shuffle_rows, train_test_split, TrainTestSplit};
pub use stats::{class_distribution, column_stats, ColumnStats};
