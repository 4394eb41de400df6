use windows::core::HSTRING;
use windows::Win32::System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ};

const ACCOUNTS_KEY: &str = r"Software\Microsoft\OneDrive\Accounts";

pub(crate) fn business_account_folders(max_accounts: u32) -> Vec<String> {
    (1..=max_accounts)
        .filter_map(|n| read_user_folder(&format!(r"{ACCOUNTS_KEY}\Business{n}")))
        .collect()
}

fn read_user_folder(subkey: &str) -> Option<String> {
    let subkey = HSTRING::from(subkey);
    let value = HSTRING::from("UserFolder");

    let mut size: u32 = 0;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            &subkey,
            &value,
            RRF_RT_REG_SZ,
            None,
            None,
            Some(&mut size),
        )
    };
    if status.is_err() || size == 0 {
        return None;
    }

    let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            &subkey,
            &value,
            RRF_RT_REG_SZ,
            None,
            Some(buffer.as_mut_ptr().cast()),
            Some(&mut size),
        )
    };
    if status.is_err() {
        return None;
    }

    let len = buffer.iter().position(|c| *c == 0).unwrap_or(buffer.len());
    let folder = String::from_utf16_lossy(&buffer[..len]);
    (!folder.trim().is_empty()).then_some(folder)
}
