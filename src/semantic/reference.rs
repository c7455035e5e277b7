//! Reference metadata for framework types the binder can resolve
//!
//! The binder has no access to compiled assemblies, so the framework surface
//! it knows about is listed here: namespaces, constructor overloads by
//! parameter name, methods and settable properties. Only types that matter
//! to rule matching or receiver typing are listed.

use super::{MethodSymbol, ParameterSymbol, TypeSymbol};

/// A method overload of a reference type
#[derive(Debug, Clone, Copy)]
pub struct ReferenceMethod {
    pub name: &'static str,
    pub parameters: &'static [&'static str],
    pub is_static: bool,
    /// Full name of the returned type, when the binder should follow it
    pub returns: Option<&'static str>,
}

/// A framework type known to the binder
#[derive(Debug, Clone, Copy)]
pub struct ReferenceType {
    pub namespace: &'static str,
    pub name: &'static str,
    /// Constructor overloads, one parameter-name list each
    pub constructors: &'static [&'static [&'static str]],
    pub methods: &'static [ReferenceMethod],
    pub properties: &'static [&'static str],
}

impl ReferenceType {
    pub fn symbol(&self) -> TypeSymbol {
        TypeSymbol::new(self.namespace, self.name)
    }

    pub fn full_name(&self) -> String {
        self.symbol().full_name()
    }

    /// Constructor overload taking exactly `arity` arguments
    pub fn constructor(&self, arity: usize) -> Option<MethodSymbol> {
        self.constructors
            .iter()
            .find(|params| params.len() == arity)
            .map(|params| MethodSymbol::constructor(self.symbol(), to_parameters(params)))
    }

    /// Method overload named `name` taking exactly `arity` arguments
    pub fn method(&self, name: &str, arity: usize, case_sensitive: bool) -> Option<&ReferenceMethod> {
        self.methods.iter().find(|m| {
            m.parameters.len() == arity
                && if case_sensitive {
                    m.name == name
                } else {
                    m.name.eq_ignore_ascii_case(name)
                }
        })
    }

    pub fn method_symbol(&self, method: &ReferenceMethod) -> MethodSymbol {
        MethodSymbol::ordinary(self.symbol(), method.name, to_parameters(method.parameters))
    }

    /// Property named `name`, returned with its canonical spelling
    pub fn property(&self, name: &str, case_sensitive: bool) -> Option<&'static str> {
        self.properties.iter().copied().find(|p| {
            if case_sensitive {
                *p == name
            } else {
                p.eq_ignore_ascii_case(name)
            }
        })
    }
}

fn to_parameters(names: &[&str]) -> Vec<ParameterSymbol> {
    names.iter().map(|n| ParameterSymbol::new(*n)).collect()
}

const NO_METHODS: &[ReferenceMethod] = &[];

const X509_IMPORT: &[ReferenceMethod] = &[
    ReferenceMethod {
        name: "Import",
        parameters: &["rawData"],
        is_static: false,
        returns: None,
    },
    ReferenceMethod {
        name: "Import",
        parameters: &["fileName"],
        is_static: false,
        returns: None,
    },
    ReferenceMethod {
        name: "Import",
        parameters: &["fileName", "password", "keyStorageFlags"],
        is_static: false,
        returns: None,
    },
];

/// Framework types known to the binder
pub static FRAMEWORK_TYPES: &[ReferenceType] = &[
    ReferenceType {
        namespace: "System",
        name: "Guid",
        constructors: &[&[], &["g"]],
        methods: &[
            ReferenceMethod {
                name: "NewGuid",
                parameters: &[],
                is_static: true,
                returns: Some("System.Guid"),
            },
            ReferenceMethod {
                name: "ToString",
                parameters: &[],
                is_static: false,
                returns: Some("System.String"),
            },
        ],
        properties: &[],
    },
    ReferenceType {
        namespace: "System",
        name: "String",
        constructors: &[],
        methods: &[ReferenceMethod {
            name: "Concat",
            parameters: &["str0", "str1"],
            is_static: true,
            returns: Some("System.String"),
        }],
        properties: &["Length"],
    },
    ReferenceType {
        namespace: "System.Net",
        name: "NetworkCredential",
        constructors: &[&[], &["userName", "password"], &["userName", "password", "domain"]],
        methods: NO_METHODS,
        properties: &["UserName", "Password", "Domain"],
    },
    ReferenceType {
        namespace: "System.Security.Cryptography",
        name: "PasswordDeriveBytes",
        constructors: &[
            &["password", "salt"],
            &["password", "salt", "hashName", "iterations"],
        ],
        methods: &[ReferenceMethod {
            name: "GetBytes",
            parameters: &["cb"],
            is_static: false,
            returns: None,
        }],
        properties: &["HashName", "IterationCount", "Salt"],
    },
    ReferenceType {
        namespace: "System.Security.Cryptography",
        name: "Rfc2898DeriveBytes",
        constructors: &[
            &["password", "saltSize"],
            &["password", "salt", "iterations"],
            &["password", "salt", "iterations", "hashAlgorithm"],
        ],
        methods: &[ReferenceMethod {
            name: "GetBytes",
            parameters: &["cb"],
            is_static: false,
            returns: None,
        }],
        properties: &["IterationCount", "Salt"],
    },
    ReferenceType {
        namespace: "System.DirectoryServices",
        name: "DirectoryEntry",
        constructors: &[
            &[],
            &["path"],
            &["path", "username", "password"],
            &["path", "username", "password", "authenticationType"],
        ],
        methods: NO_METHODS,
        properties: &["Username", "Password", "Path", "AuthenticationType"],
    },
    ReferenceType {
        namespace: "System.Security.Cryptography.X509Certificates",
        name: "X509Certificate2",
        constructors: &[
            &[],
            &["fileName"],
            &["fileName", "password"],
            &["fileName", "password", "keyStorageFlags"],
        ],
        methods: X509_IMPORT,
        properties: &["FriendlyName"],
    },
    ReferenceType {
        namespace: "System.Security.Cryptography.X509Certificates",
        name: "X509Certificate",
        constructors: &[
            &[],
            &["fileName"],
            &["fileName", "password"],
            &["fileName", "password", "keyStorageFlags"],
        ],
        methods: X509_IMPORT,
        properties: &[],
    },
    ReferenceType {
        namespace: "System.Data.SqlClient",
        name: "SqlConnectionStringBuilder",
        constructors: &[&[], &["connectionString"]],
        methods: NO_METHODS,
        properties: &["Password", "UserID", "DataSource", "InitialCatalog"],
    },
];

/// Look up a framework type by fully qualified name
pub fn find_framework_type(full_name: &str, case_sensitive: bool) -> Option<&'static ReferenceType> {
    FRAMEWORK_TYPES.iter().find(|t| {
        let name = t.full_name();
        if case_sensitive {
            name == full_name
        } else {
            name.eq_ignore_ascii_case(full_name)
        }
    })
}
