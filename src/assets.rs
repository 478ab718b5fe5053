#[cfg(test)]
#[path = "./assets_test.rs"]
mod assets_test;

use crate::loader::{HtFile, Loader};

pub const NUM_PICS: usize = 26;

const STRUCTPIC: usize = 0;
const STARTPICS: usize = 1;
const STARTTILE8: usize = STARTPICS + NUM_PICS;
pub const NUM_TILE8: usize = 72;
const TILE8_BYTES: usize = 8 * 4; // 8x8 pixels, 4 planes, 1 byte per row per plane

pub const NUM_CHUNKS: usize = STARTTILE8 + 1;

/// Sentinel word that introduces a (count, value) pair in the RLE stream.
pub const RLE_TAG: u16 = 0xFEFE;

/// Chunk numbers of the sprite pictures. PicSizes is the table chunk,
/// everything after it is a drawable picture.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GraphicNum {
    PicSizes = 0,
    Shot = 1,
    BigShot = 2,
    TankShot = 3,
    Refugee1 = 4,
    Refugee2 = 5,
    Drone1 = 6,
    Drone2 = 7,
    Drone3 = 8,
    Drone4 = 9,
    Tank = 10,
    Mutant1 = 11,
    Mutant2 = 12,
    Mutant3 = 13,
    MutantHit = 14,
    Shield1 = 15,
    Shield2 = 16,
    Warp1 = 17,
    Warp2 = 18,
    Warp3 = 19,
    Warp4 = 20,
    Explosion1 = 21,
    Explosion2 = 22,
    Explosion3 = 23,
    Explosion4 = 24,
    Explosion5 = 25,
    DeadRefugee = 26,
}

pub struct Graphic {
    /// EGA layout: four whole bit planes back to back, each row
    /// width/8 bytes, most significant bit leftmost.
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Decode the four bit planes into one color byte per pixel, leftmost
/// pixel in the most significant bit of each plane byte.
pub fn linearize(g: &Graphic) -> Vec<u8> {
    let row_bytes = g.width / 8;
    let plane_bytes = row_bytes * g.height;
    let mut out = vec![0u8; g.width * g.height];
    for plane in 0..4 {
        let plane_data = &g.data[(plane * plane_bytes)..((plane + 1) * plane_bytes)];
        for y in 0..g.height {
            for x in 0..g.width {
                let byte = plane_data[y * row_bytes + x / 8];
                if byte & (0x80 >> (x % 8)) != 0 {
                    out[y * g.width + x] |= 1 << plane;
                }
            }
        }
    }
    out
}

pub struct Huffnode {
    pub bit0: u16,
    pub bit1: u16,
}

pub fn to_huffnodes(bytes: &[u8]) -> Result<Vec<Huffnode>, String> {
    if bytes.len() < 255 * 4 {
        return Err(format!("huffman dictionary too short: {} bytes", bytes.len()));
    }
    let mut nodes = Vec::with_capacity(255);
    let mut offset = 0;
    for _ in 0..255 {
        let bit0 = u16::from_le_bytes(bytes[offset..(offset + 2)].try_into().unwrap());
        let bit1 = u16::from_le_bytes(bytes[(offset + 2)..(offset + 4)].try_into().unwrap());
        nodes.push(Huffnode { bit0, bit1 });
        offset += 4;
    }
    Ok(nodes)
}

/// Walks the huffman tree from the root at node 254, consuming input
/// bits LSB first. Node values below 256 are uncompressed bytes, values
/// of 256 and up point at the next node.
pub fn huff_expand(data: &[u8], len: usize, dict: &[Huffnode]) -> Result<Vec<u8>, String> {
    let mut expanded = Vec::with_capacity(len);
    let head = &dict[254];
    let mut node = head;
    let mut read = 0;
    if data.is_empty() {
        if len == 0 {
            return Ok(expanded);
        }
        return Err("huffman data empty".to_string());
    }
    let mut input = data[read];
    read += 1;
    let mut mask: u8 = 0x01;
    while expanded.len() < len {
        let node_value = if (input & mask) == 0 {
            node.bit0
        } else {
            node.bit1
        };

        if mask == 0x80 {
            if read >= data.len() {
                if expanded.len() + 1 == len && node_value < 256 {
                    // last byte decoded from the final bit of input
                    expanded.push(node_value as u8);
                    break;
                }
                return Err(format!(
                    "huffman data ran out after {} of {} bytes",
                    expanded.len(),
                    len
                ));
            }
            input = data[read];
            read += 1;
            mask = 1;
        } else {
            mask <<= 1;
        }

        if node_value < 256 {
            expanded.push(node_value as u8);
            node = head;
        } else {
            node = &dict[(node_value - 256) as usize];
        }
    }
    Ok(expanded)
}

/// Word-oriented run length expansion. The first word of source is the
/// expanded length in bytes, then words are copied through until the
/// tag word, which is followed by a count word and a value word.
/// Exceeding max_len means the data is corrupt and is a hard error.
pub fn rle_expand(source: &[u8], max_len: usize) -> Result<Vec<u8>, String> {
    if source.len() < 2 || source.len() % 2 != 0 {
        return Err(format!("rle source length invalid: {}", source.len()));
    }
    let word = |ix: usize| u16::from_le_bytes(source[ix..(ix + 2)].try_into().unwrap());

    let length = word(0) as usize;
    if length > max_len {
        return Err(format!("rle expanded length {} exceeds limit {}", length, max_len));
    }

    let mut expanded = Vec::with_capacity(length);
    let mut ix = 2;
    while expanded.len() < length {
        if ix >= source.len() {
            return Err(format!(
                "rle data ran out after {} of {} bytes",
                expanded.len(),
                length
            ));
        }
        let value = word(ix);
        ix += 2;
        if value == RLE_TAG {
            if ix + 4 > source.len() {
                return Err("rle tag without count and value".to_string());
            }
            let count = word(ix) as usize;
            let fill = word(ix + 2);
            ix += 4;
            if expanded.len() + count * 2 > length {
                return Err(format!(
                    "rle run of {} words overflows expanded length {}",
                    count, length
                ));
            }
            for _ in 0..count {
                expanded.extend_from_slice(&fill.to_le_bytes());
            }
        } else {
            if expanded.len() + 2 > length {
                return Err("rle literal word overflows expanded length".to_string());
            }
            expanded.extend_from_slice(&value.to_le_bytes());
        }
    }
    Ok(expanded)
}

/// All decoded graphics of the game. Pictures are indexed by GraphicNum
/// minus STARTPICS, the 8x8 tiles by their sheet position.
pub struct Graphics {
    pub pics: Vec<Graphic>,
    pub tile8: Vec<Vec<u8>>,
}

pub fn load_all_graphics(loader: &dyn Loader) -> Result<Graphics, String> {
    let dict_bytes = loader.load_file(HtFile::GraphicsDict)?;
    let dict = to_huffnodes(&dict_bytes)?;

    let heads = loader.load_file(HtFile::GraphicsHead)?;
    let grdata = loader.load_file(HtFile::GraphicsData)?;

    let picsizes = extract_picsizes(&grdata, &heads, &dict)?;

    let mut pics = Vec::with_capacity(NUM_PICS);
    for chunk in STARTPICS..(STARTPICS + NUM_PICS) {
        pics.push(load_pic(chunk, &heads, &grdata, &dict, &picsizes)?);
    }

    let tile8 = load_tile8(&heads, &grdata, &dict)?;

    Ok(Graphics { pics, tile8 })
}

pub fn pic(graphics: &Graphics, num: GraphicNum) -> &Graphic {
    &graphics.pics[num as usize - STARTPICS]
}

fn extract_picsizes(
    grdata: &[u8],
    heads: &[u8],
    dict: &[Huffnode],
) -> Result<Vec<(usize, usize)>, String> {
    let (complen, explen) = gr_chunk_length(STRUCTPIC, grdata, heads)?;
    if explen != NUM_PICS * 4 {
        return Err(format!(
            "size table holds {} entries, code expects {}",
            explen / 4,
            NUM_PICS
        ));
    }
    let f_offset = gr_file_pos(STRUCTPIC, heads)
        .ok_or("size table chunk missing from archive")?
        + 4;
    let expanded = huff_expand(&grdata[f_offset..(f_offset + complen)], explen, dict)?;

    let mut picsizes = Vec::with_capacity(NUM_PICS);
    let mut offset = 0;
    for _ in 0..NUM_PICS {
        let width = i16::from_le_bytes(expanded[offset..(offset + 2)].try_into().unwrap());
        let height = i16::from_le_bytes(expanded[(offset + 2)..(offset + 4)].try_into().unwrap());
        picsizes.push((width as usize, height as usize));
        offset += 4;
    }
    Ok(picsizes)
}

/// Offset of a chunk in the data file, None for chunks not present in
/// this archive.
fn gr_file_pos(chunk: usize, heads: &[u8]) -> Option<usize> {
    let offset = chunk * 4;
    let value = u32::from_le_bytes(heads[offset..(offset + 4)].try_into().unwrap());
    if value == 0xFFFF_FFFF {
        None
    } else {
        Some(value as usize)
    }
}

/// Compressed and expanded length of a chunk with a length header.
fn gr_chunk_length(chunk: usize, grdata: &[u8], heads: &[u8]) -> Result<(usize, usize), String> {
    let file_offset =
        gr_file_pos(chunk, heads).ok_or(format!("chunk {} missing from archive", chunk))?;
    let explen =
        u32::from_le_bytes(grdata[file_offset..(file_offset + 4)].try_into().unwrap()) as usize;
    Ok((next_chunk_pos(chunk, heads, grdata.len()) - file_offset - 4, explen))
}

fn next_chunk_pos(chunk: usize, heads: &[u8], data_len: usize) -> usize {
    let mut next = chunk + 1;
    while next < NUM_CHUNKS {
        if let Some(pos) = gr_file_pos(next, heads) {
            return pos;
        }
        next += 1;
    }
    // the last present chunk runs to the end of the data file
    data_len
}

fn load_pic(
    chunk: usize,
    heads: &[u8],
    grdata: &[u8],
    dict: &[Huffnode],
    picsizes: &[(usize, usize)],
) -> Result<Graphic, String> {
    let pos = gr_file_pos(chunk, heads).ok_or(format!("picture chunk {} missing", chunk))?;
    let (complen, explen) = gr_chunk_length(chunk, grdata, heads)?;
    let expanded = huff_expand(&grdata[(pos + 4)..(pos + 4 + complen)], explen, dict)?;

    let (width, height) = picsizes[chunk - STARTPICS];
    if width % 8 != 0 || width == 0 || height == 0 {
        return Err(format!("picture {} has bad size {}x{}", chunk, width, height));
    }
    if expanded.len() != width / 8 * height * 4 {
        return Err(format!(
            "picture {} expanded to {} bytes, size table says {}x{}",
            chunk,
            expanded.len(),
            width,
            height
        ));
    }
    Ok(Graphic {
        data: expanded,
        width,
        height,
    })
}

/// The tile sheet chunk has no length header, all tiles are the same
/// known size.
fn load_tile8(heads: &[u8], grdata: &[u8], dict: &[Huffnode]) -> Result<Vec<Vec<u8>>, String> {
    let pos = gr_file_pos(STARTTILE8, heads).ok_or("tile sheet chunk missing")?;
    let complen = next_chunk_pos(STARTTILE8, heads, grdata.len()) - pos;
    let explen = NUM_TILE8 * TILE8_BYTES;
    let expanded = huff_expand(&grdata[pos..(pos + complen)], explen, dict)?;

    let mut tiles = Vec::with_capacity(NUM_TILE8);
    for t in 0..NUM_TILE8 {
        tiles.push(expanded[(t * TILE8_BYTES)..((t + 1) * TILE8_BYTES)].to_vec());
    }
    Ok(tiles)
}
