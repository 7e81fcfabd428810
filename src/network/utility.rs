use async_std::io::BufReader;
use async_std::net::TcpStream;
use futures::AsyncReadExt;

pub async fn read_n_bytes(reader: &mut BufReader<TcpStream>, n: u32) -> Option<Vec<u8>> {
    let mut pay_load = vec![0u8; n as usize];
    if reader.read_exact(&mut pay_load).await.is_err() {
        None
    } else {
        Some(pay_load)
    }
}

pub async fn read_be_u32(reader: &mut BufReader<TcpStream>) -> Option<u32> {
    let mut bytes = [0u8; 4];
    if reader.read_exact(&mut bytes).await.is_err() {
        None
    } else {
        Some(u32::from_be_bytes(bytes))
    }
}
