//! Per-call options that end up as request query parameters.

use url::Url;

/// An option attached to a single API call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CallOption {
    /// Arbitrary string identifying a user for quota accounting (`quotaUser`)
    QuotaUser(String),
    /// IP address of the end user for quota accounting (`userIp`)
    UserIp(String),
    /// Trace token for the request (`trace=token:<t>`)
    Trace(String),
    /// A custom query parameter; multiple values are joined with `,`
    QueryParameter { key: String, values: Vec<String> },
}

impl CallOption {
    /// Convenience constructor for [`CallOption::QueryParameter`].
    #[must_use]
    pub fn query_parameter<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::QueryParameter {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the query parameter name and value for this option.
    #[must_use]
    pub fn query_pair(&self) -> (&str, String) {
        match self {
            Self::QuotaUser(user) => ("quotaUser", user.clone()),
            Self::UserIp(ip) => ("userIp", ip.clone()),
            Self::Trace(token) => ("trace", format!("token:{token}")),
            Self::QueryParameter { key, values } => (key.as_str(), values.join(",")),
        }
    }
}

/// Appends the query parameters for `options` to `url`.
///
/// Existing parameters are kept; an option overrides an earlier parameter of
/// the same name.
pub fn apply_call_options(url: &mut Url, options: &[CallOption]) {
    if options.is_empty() {
        return;
    }

    let overridden: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !options.iter().any(|option| name == option.query_pair().0))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    for (name, value) in &overridden {
        query.append_pair(name, value);
    }
    for option in options {
        let (name, value) = option.query_pair();
        query.append_pair(name, &value);
    }
}
