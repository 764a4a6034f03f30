/*
[INPUT]:  User-supplied identifiers (addresses, hashes, CIDs, student ids)
[OUTPUT]: Format checks
[POS]:    Utility layer - input validation before records reach the ledger or backend
[UPDATE]: When identifier formats change
*/

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `0x` followed by 40 hex digits, any case
pub fn is_valid_ethereum_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|rest| rest.len() == 40 && is_hex(rest))
}

/// 64 hex digits, no prefix
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64 && is_hex(hash)
}

/// Student number (NIM): exactly 8 digits
pub fn is_valid_student_id(id: &str) -> bool {
    id.len() == 8 && id.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

pub fn is_valid_date(date: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(date).is_ok()
        || chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// IPFS CIDv0 (`Qm` + 44 alphanumerics) or CIDv1 base32 (`bafy...`)
pub fn is_valid_cid(cid: &str) -> bool {
    let alnum = |s: &str| s.bytes().all(|b| b.is_ascii_alphanumeric());
    if let Some(rest) = cid.strip_prefix("Qm") {
        return rest.len() == 44 && alnum(rest);
    }
    cid.strip_prefix("bafy")
        .is_some_and(|rest| !rest.is_empty() && alnum(rest))
}
