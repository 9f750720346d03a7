// Q-BRIDGE PortList bitmaps: port 1 is the most significant bit of the
// first octet.

pub fn has_port(list: &[u8], port: u32) -> bool {
    let Some((byte, mask)) = position(port) else {
        return false;
    };
    list.get(byte).is_some_and(|b| b & mask != 0)
}

/// A copy of `list` with `port` set or cleared, grown as needed.
pub fn with_port(list: &[u8], port: u32, member: bool) -> Vec<u8> {
    let mut out = list.to_vec();
    let Some((byte, mask)) = position(port) else {
        return out;
    };
    if out.len() <= byte {
        if !member {
            return out;
        }
        out.resize(byte + 1, 0);
    }
    if member {
        out[byte] |= mask;
    } else {
        out[byte] &= !mask;
    }
    out
}

/// Member port numbers in ascending order.
pub fn ports(list: &[u8]) -> Vec<u32> {
    let mut out = Vec::new();
    for (i, byte) in list.iter().enumerate() {
        for bit in 0..8u32 {
            if byte & (0x80 >> bit) != 0 {
                if let Ok(i) = u32::try_from(i) {
                    out.push(i * 8 + bit + 1);
                }
            }
        }
    }
    out
}

fn position(port: u32) -> Option<(usize, u8)> {
    let zero_based = port.checked_sub(1)?;
    let byte = usize::try_from(zero_based / 8).ok()?;
    Some((byte, 0x80 >> (zero_based % 8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_one_is_msb() {
        assert!(has_port(&[0x80], 1));
        assert!(!has_port(&[0x80], 2));
        assert!(has_port(&[0x00, 0x01], 16));
        assert!(!has_port(&[0xff], 0));
    }

    #[test]
    fn set_and_clear_grow_only_when_adding() {
        let list = with_port(&[], 10, true);
        assert_eq!(list, vec![0x00, 0x40]);
        assert_eq!(with_port(&list, 10, false), vec![0x00, 0x00]);
        assert_eq!(with_port(&[0x80], 20, false), vec![0x80]);
    }

    #[test]
    fn lists_member_ports() {
        assert_eq!(ports(&[0xa0, 0x01]), vec![1, 3, 16]);
    }
}
