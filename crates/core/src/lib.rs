pub mod auth;
pub mod config;
pub mod customers;
pub mod domain;
pub mod errors;
pub mod faq;
pub mod fixtures;
pub mod model;
pub mod recommend;
pub mod segment;

pub use auth::{authenticate, verify_credentials};
pub use config::{
    AppConfig, ConfigError, ConfigOverrides, DataConfig, LoadOptions, LogFormat, LoggingConfig,
};
pub use customers::{ClusterAssignments, CustomerTable};
pub use domain::customer::{CustomerId, CustomerRecord, ProductCategory};
pub use domain::session::{ChatTurn, Role, Sender, SessionContext};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use faq::{FaqEntry, FaqResponder, FaqTable, CONFIDENCE_THRESHOLD};
pub use fixtures::DemoDataset;
pub use model::{ModelBundle, Prediction};
pub use recommend::{Recommender, DEFAULT_TOP_N, GUIDANCE, LOGIN_PROMPT};
pub use segment::{segment, IntentSegments, RECOMMENDATION_KEYWORDS};
