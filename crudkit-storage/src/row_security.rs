//! Row-security filter lookup.
//!
//! Visibility rules live server-side in the `profilefilter` table, one SQL
//! predicate fragment per (role, table) pair. The fragment may reference the
//! acting user through the `:userid` token, which is substituted with the
//! actor's id before the fragment is appended to a read query.

use tracing::debug;

use crudkit_core::traits::Driver;
use crudkit_core::types::actor::ActorContext;

/// The token inside a stored fragment that stands for the actor's id.
const USER_ID_TOKEN: &str = ":userid";

/// Fetch the filter fragment scoped to this actor's role and the target
/// table. Lookup failures and absent rules both mean "no injection" — the
/// read path never throws on account of row security.
pub(crate) fn filter_fragment(
    driver: &dyn Driver,
    actor: &ActorContext,
    table: &str,
) -> Option<String> {
    let sql = format!(
        "SELECT queryfilter FROM profilefilter \
         WHERE profile = {} AND tablename = '{}'",
        actor.role,
        table.replace('\'', "''")
    );

    match driver.query(&sql) {
        Ok(rows) => rows
            .first()
            .and_then(|row| row.get("queryfilter"))
            .and_then(|value| value.as_str())
            .map(|fragment| fragment.replace(USER_ID_TOKEN, &actor.id.to_string())),
        Err(e) => {
            debug!("row-security lookup failed for table {table}: {e}");
            None
        }
    }
}
