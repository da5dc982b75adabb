use std::collections::HashMap;

use url::Url;

/// Query parameters of a redirect target such as `openid://?code=...&state=...`
pub fn query_params(location: &str) -> Result<HashMap<String, String>, url::ParseError> {
    let url = Url::parse(location)?;
    Ok(url.query_pairs().into_owned().collect())
}
