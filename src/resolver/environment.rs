/// Source of the variables and account registrations the resolver inspects.
pub trait HostEnvironment {
    fn var(&self, name: &str) -> Option<String>;

    /// Every variable as `(name, value)`, in a stable order.
    fn vars(&self) -> Vec<(String, String)>;

    /// `UserFolder` values of the numbered business account registrations.
    fn business_account_folders(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }

    fn vars(&self) -> Vec<(String, String)> {
        let mut vars = std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect::<Vec<_>>();
        vars.sort();
        vars
    }

    #[cfg(windows)]
    fn business_account_folders(&self) -> Vec<String> {
        super::registry::business_account_folders(super::MAX_BUSINESS_ACCOUNTS)
    }

    #[cfg(not(windows))]
    fn business_account_folders(&self) -> Vec<String> {
        Vec::new()
    }
}
