use bytestream_rs::{concat, flat, StreamError};

fn main() {
    println!("bytestream-rs Concatenation Example");
    println!("====================================\n");

    // Two independent contents; imagine one in flash and one generated.
    let header = flat(&b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\n\r\n"[..]).unwrap();
    let body = flat(b"hello from a composed stream".to_vec()).unwrap();

    // O(1) composition, no bytes copied. Both inputs stay usable.
    let mut response = concat(&header, &body).unwrap();
    println!("composed size: {} bytes", response.remaining_size());
    println!("header handles: {}", header.ref_count());
    println!("body handles:   {}\n", body.ref_count());

    // A consumer drains the composition through a small local buffer.
    let mut buf = [0u8; 16];
    let mut assembled = Vec::new();
    loop {
        match response.read(&mut buf) {
            Ok(n) => {
                println!("read {:2} bytes at position {}", n, response.position() - n as u64);
                assembled.extend_from_slice(&buf[..n]);
            }
            Err(StreamError::EndOfStream) => break,
            Err(e) => panic!("read failed: {e}"),
        }
    }
    println!("\nassembled: {:?}", String::from_utf8_lossy(&assembled));

    // Acknowledge the 45-byte header; the pending window now starts at the body.
    response.release(44).unwrap();
    println!("after releasing the header, reset lands at {}", {
        response.reset().unwrap();
        response.position()
    });

    let snap = response.metrics();
    println!(
        "\ncomposite metrics: {} reads, {} bytes",
        snap.reads, snap.bytes_read
    );
}
