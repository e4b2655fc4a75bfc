//! CRC-32 as png uses it, reflected polynomial 0xEDB88320,
//! initial value of all ones, final complement.

/// Build the byte-at-a-time lookup table
const fn make_crc_table() -> [u32; 256]
{
    let mut table = [0_u32; 256];
    let mut n = 0;

    while n < 256
    {
        let mut c = n as u32;
        let mut k = 0;

        while k < 8
        {
            c = if c & 1 == 1
            {
                0xEDB8_8320 ^ (c >> 1)
            }
            else
            {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = make_crc_table();

/// Feed `data` into a running crc state.
///
/// The state is kept pre-inverted, start from `u32::MAX` and
/// complement the final state to get the checksum, or use
/// [`crc32`] for the one shot form. Updating over a split
/// buffer equals one update over the whole buffer.
pub(crate) fn crc32_update(state: u32, data: &[u8]) -> u32
{
    let mut c = state;

    for byte in data
    {
        c = CRC_TABLE[usize::from((c as u8) ^ byte)] ^ (c >> 8);
    }
    c
}

/// Compute the crc32 of a whole buffer
pub(crate) fn crc32(data: &[u8]) -> u32
{
    !crc32_update(u32::MAX, data)
}
