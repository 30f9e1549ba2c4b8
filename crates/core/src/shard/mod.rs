mod error;
mod http_mapping;
mod router;
mod traits;
mod types;

pub use error::{CloseErrors, Result, ShardError, ShardFailure};
pub use http_mapping::shard_error_to_status_code;
pub use router::{route, Crc32Router, ShardRouter};
pub use traits::ShardBackend;
pub use types::{parse_user_id, shard_file_name, UserRecord};
