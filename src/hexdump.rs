/// Dump `bytes` as big-endian 32-bit words, `stride` words per line.
///
/// Each line starts with the address of its first word, counted from `base`. A trailing
/// partial word is padded with zeros.
pub fn hexdump_words(bytes: &[u8], base: u32, stride: usize) -> String {
    let stride = stride.max(1);
    let mut str = String::new();

    for (ix, word) in bytes.chunks(4).enumerate() {
        if ix % stride == 0 {
            if ix != 0 {
                str.push('\n');
            }
            let offset = base.wrapping_add((ix * 4) as u32);
            str.push_str(format!("{:08X}:", offset).as_str());
        }
        let mut padded = [0; 4];
        padded[..word.len()].copy_from_slice(word);
        str.push_str(format!(" {:08X}", u32::from_be_bytes(padded)).as_str());
    }

    str
}
