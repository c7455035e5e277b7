//! Source fixtures in both surface syntaxes
//!
//! Pairs share a name prefix and describe the same program; each pair must
//! produce the same diagnostics.

pub const CSHARP_NETWORK_CREDENTIAL: &str = r#"
using System;
using System.Net;

namespace VulnerableApp
{
    class HardCodedPassword
    {
        static void TestHardcodedValue()
        {
            var test = new NetworkCredential(Guid.NewGuid().ToString(), "pass");
        }
    }
}
"#;

pub const VB_NETWORK_CREDENTIAL: &str = r#"
Imports System
Imports System.Net

Namespace VulnerableApp
    Class HardCodedPassword
        Private Shared Sub TestHardcodedValue()
            Dim test = New NetworkCredential(Guid.NewGuid().ToString(), "pass")
        End Sub
    End Class
End Namespace
"#;

pub const CSHARP_PASSWORD_DERIVE_BYTES: &str = r#"
using System.Security.Cryptography;

namespace VulnerableApp
{
    class HardCodedPassword
    {
        static void TestHardcodedValue()
        {
            var test = new PasswordDeriveBytes("hardcode", new byte[] { 0, 1, 2, 3 });
        }
    }
}
"#;

pub const VB_PASSWORD_DERIVE_BYTES: &str = r#"
Imports System.Security.Cryptography

Namespace VulnerableApp
    Class HardCodedPassword
        Private Shared Sub TestHardcodedValue()
            Dim test = New PasswordDeriveBytes("hardcode", New Byte() {0, 1, 2, 3})
        End Sub
    End Class
End Namespace
"#;

pub const CSHARP_PARAMETER_PASSWORD: &str = r#"
using System.Security.Cryptography;

namespace VulnerableApp
{
    class HardCodedPassword
    {
        static void TestHardcodedValue(string input)
        {
            var test = new PasswordDeriveBytes(input, new byte[] { 0, 1, 2, 3 });
        }
    }
}
"#;

pub const VB_PARAMETER_PASSWORD: &str = r#"
Imports System.Security.Cryptography

Namespace VulnerableApp
    Class HardCodedPassword
        Private Shared Sub TestHardcodedValue(input As String)
            Dim test = New PasswordDeriveBytes(input, New Byte() {0, 1, 2, 3})
        End Sub
    End Class
End Namespace
"#;

pub const CSHARP_LOCAL_PASSWORD: &str = r#"
using System.Net;

class C
{
    void M()
    {
        string password = "pass";
        var test = new NetworkCredential("user", password);
    }
}
"#;

pub const VB_LOCAL_PASSWORD: &str = r#"
Imports System.Net

Class C
    Sub M()
        Dim password As String = "pass"
        Dim test = New NetworkCredential("user", password)
    End Sub
End Class
"#;

pub const CSHARP_SETTERS: &str = r#"
using System.Net;
using System.Data.SqlClient;
using System.DirectoryServices;

class Settings
{
    void Configure(string fromVault)
    {
        var credential = new NetworkCredential();
        credential.Password = "letmein";

        var builder = new SqlConnectionStringBuilder { DataSource = "db", Password = "sa" };

        var entry = new DirectoryEntry("LDAP://corp");
        entry.Password = fromVault;
    }
}
"#;

pub const VB_SETTERS: &str = r#"
Imports System.Net
Imports System.Data.SqlClient
Imports System.DirectoryServices

Class Settings
    Sub Configure(fromVault As String)
        Dim credential As New NetworkCredential()
        credential.Password = "letmein"

        Dim builder As New SqlConnectionStringBuilder With {.DataSource = "db", .Password = "sa"}

        Dim entry As New DirectoryEntry("LDAP://corp")
        entry.Password = fromVault
    End Sub
End Class
"#;

pub const CSHARP_MANY_SINKS: &str = r#"
using System.Net;
using System.Security.Cryptography;
using System.Security.Cryptography.X509Certificates;
using System.DirectoryServices;

class Sinks
{
    private NetworkCredential service = new NetworkCredential("svc", "field-secret");

    void Run(string user, byte[] salt)
    {
        new NetworkCredential(user, "a");
        new NetworkCredential(user, "b" + "c", "CORP");
        new Rfc2898DeriveBytes("derive", salt, 1000);
        new DirectoryEntry("LDAP://x", user, "dir-secret");
        var cert = new X509Certificate2("cert.pfx", "cert-secret");
        cert.Import("other.pfx", "import-secret", 0);
        new X509Certificate("old.cer", (string)"cast-secret");
        new NetworkCredential(user, null);
        new NetworkCredential(user, user);
    }
}
"#;

pub const VB_MANY_SINKS: &str = r#"
Imports System.Net
Imports System.Security.Cryptography
Imports System.Security.Cryptography.X509Certificates
Imports System.DirectoryServices

Class Sinks
    Private service As New NetworkCredential("svc", "field-secret")

    Sub Run(user As String, salt As Byte())
        Dim a = New NetworkCredential(user, "a")
        Dim b = New NetworkCredential(user, "b" & "c", "CORP")
        Dim c = New Rfc2898DeriveBytes("derive", salt, 1000)
        Dim d = New DirectoryEntry("LDAP://x", user, "dir-secret")
        Dim cert As New X509Certificate2("cert.pfx", "cert-secret")
        cert.Import("other.pfx", "import-secret", 0)
        Dim e = New X509Certificate("old.cer", CStr("cast-secret"))
        Dim f = New NetworkCredential(user, Nothing)
        Dim g = New NetworkCredential(user, user)
    End Sub
End Class
"#;

pub const CSHARP_CLEAN: &str = r#"
using System;

class Clean
{
    int Add(int a, int b) => a + b;
}
"#;
