//! Tesla OAuth constants
//!
//! Public client configuration used by the Tesla owner app flow. None of
//! these are secrets; the access/refresh tokens live in the credential store.

/// Public OAuth client ID for the owner API
pub const TESLA_CLIENT_ID: &str = "ownerapi";

/// Redirect URI registered for the `ownerapi` client
pub const REDIRECT_URI: &str = "https://auth.tesla.com/void/callback";

/// Authorization endpoint the browser is sent to
pub const AUTHORIZE_ENDPOINT: &str = "https://auth.tesla.com/oauth2/v3/authorize";

/// Token endpoint for authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://auth.tesla.com/oauth2/v3/token";

/// Scopes needed to read charge state
pub const SCOPES: &str = "openid vehicle_device_data vehicle_charging_cmd";
