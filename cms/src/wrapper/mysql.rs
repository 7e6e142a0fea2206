use crate::types::DbCredentials;
use crate::wrapper::{quote, RemoteCommand};
use crate::ImportError;

/// Query printing the summed data and index size of one schema, in bytes,
/// with no column header.
pub fn database_size_command(credentials: &DbCredentials) -> Result<RemoteCommand, ImportError> {
    let schema = credentials.name()?.replace('\\', "\\\\").replace('\'', "''");
    let query = format!(
        "SELECT ROUND(SUM(data_length + index_length)) FROM information_schema.TABLES WHERE table_schema = '{}';",
        schema
    );
    let cmd = format!(
        "mysql {} --batch --skip-column-names -e {}",
        credentials.client_args()?,
        quote(&query)
    );
    Ok(RemoteCommand::new(cmd).with_secret(credentials.password()))
}
