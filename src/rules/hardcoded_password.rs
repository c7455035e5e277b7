//! Hardcoded password (SCS0015, CWE-259)
//!
//! Credential material written as a literal into a constructor, method or
//! property setter that consumes a password.

use crate::diagnostic::Severity;
use crate::rules::RuleCatalogEntry;

pub const RULE_ID: &str = "SCS0015";

const MESSAGE: &str = "Hardcoded password passed to {member} ({parameter})";
const SETTER_MESSAGE: &str = "Hardcoded password assigned to {type}.{member}";

const NETWORK_CREDENTIAL: &str = "System.Net.NetworkCredential";
const PASSWORD_DERIVE_BYTES: &str = "System.Security.Cryptography.PasswordDeriveBytes";
const RFC2898_DERIVE_BYTES: &str = "System.Security.Cryptography.Rfc2898DeriveBytes";
const DIRECTORY_ENTRY: &str = "System.DirectoryServices.DirectoryEntry";
const X509_CERTIFICATE2: &str = "System.Security.Cryptography.X509Certificates.X509Certificate2";
const X509_CERTIFICATE: &str = "System.Security.Cryptography.X509Certificates.X509Certificate";
const SQL_CONNECTION_STRING_BUILDER: &str = "System.Data.SqlClient.SqlConnectionStringBuilder";

/// Catalog rows for SCS0015
pub fn entries() -> Vec<RuleCatalogEntry> {
    vec![
        // Credentials
        argument(RuleCatalogEntry::constructor(NETWORK_CREDENTIAL, 1, RULE_ID)),
        setter(NETWORK_CREDENTIAL),
        // Key derivation
        argument(RuleCatalogEntry::constructor(PASSWORD_DERIVE_BYTES, 0, RULE_ID)),
        argument(RuleCatalogEntry::constructor(RFC2898_DERIVE_BYTES, 0, RULE_ID)),
        // Directory services
        argument(RuleCatalogEntry::constructor(DIRECTORY_ENTRY, 2, RULE_ID)),
        setter(DIRECTORY_ENTRY),
        // Certificates
        argument(RuleCatalogEntry::constructor(X509_CERTIFICATE2, 1, RULE_ID)),
        argument(RuleCatalogEntry::new(X509_CERTIFICATE2, "Import", 1, RULE_ID)),
        argument(RuleCatalogEntry::constructor(X509_CERTIFICATE, 1, RULE_ID)),
        // Connection strings
        setter(SQL_CONNECTION_STRING_BUILDER),
    ]
}

fn argument(entry: RuleCatalogEntry) -> RuleCatalogEntry {
    entry.with_severity(Severity::Warning).with_message(MESSAGE)
}

fn setter(type_name: &str) -> RuleCatalogEntry {
    RuleCatalogEntry::setter(type_name, "Password", RULE_ID)
        .with_severity(Severity::Warning)
        .with_message(SETTER_MESSAGE)
}
