//! Producer/consumer pipelines built from a manager and ring buffers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use physio_buffer::{BufferError, RingBuffer};
use physio_manager::{Manager, WorkerConfig};

const WINDOW: usize = 16;
const OVERLAP: usize = 4;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_windowed_consumer_sees_continuous_stream() {
    init_tracing();

    let manager = Manager::new();
    let samples = RingBuffer::<f64>::new(1024);
    let windows = Arc::new(Mutex::new(Vec::new()));

    let producer_buf = samples.clone();
    let mut next = 0.0;
    manager
        .add_loop_thread_with(
            &WorkerConfig::new().name("producer").period(Duration::from_millis(1)),
            move || {
                let chunk = [next, next + 1.0, next + 2.0, next + 3.0];
                producer_buf.enqueue_slice(&chunk).unwrap();
                next += 4.0;
            },
        )
        .unwrap();

    let consumer_buf = samples.clone();
    let sink = Arc::clone(&windows);
    manager
        .add_loop_thread_with(
            &WorkerConfig::new().name("consumer").period(Duration::from_millis(5)),
            move || {
                let mut window = [0.0; WINDOW];
                while consumer_buf.dequeue_into(&mut window, OVERLAP).is_ok() {
                    sink.lock().push(window);
                }
            },
        )
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while windows.lock().len() < 20 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    manager.close();

    let windows = windows.lock();
    assert!(windows.len() >= 20, "only {} windows", windows.len());
    for window in windows.iter() {
        assert!(window.windows(2).all(|w| w[1] == w[0] + 1.0));
    }
    for pair in windows.windows(2) {
        assert_eq!(pair[1][..OVERLAP], pair[0][WINDOW - OVERLAP..]);
    }
    assert_eq!(windows[0][0], 0.0);
}

#[test]
fn test_input_loop_exit_command_shuts_down() {
    init_tracing();

    let manager = Arc::new(Manager::new());
    let commands = RingBuffer::<String>::new(8);
    let ticks = Arc::new(Mutex::new(0usize));

    let counter = Arc::clone(&ticks);
    let self_loop = manager
        .add_loop_thread_with(
            &WorkerConfig::new().name("self").period(Duration::from_millis(2)),
            move || *counter.lock() += 1,
        )
        .unwrap();

    let inbox = commands.clone();
    let handle = Arc::clone(&manager);
    manager
        .add_loop_thread_with(
            &WorkerConfig::new().name("input").period(Duration::from_millis(2)),
            move || match inbox.dequeue() {
                Ok(command) if command == "exit" => handle.close(),
                Ok(_) | Err(BufferError::Empty) => {}
                Err(e) => panic!("unexpected buffer error: {}", e),
            },
        )
        .unwrap();

    commands.enqueue("set emotion happy".to_string()).unwrap();
    commands.enqueue("exit".to_string()).unwrap();

    let started = Instant::now();
    assert!(manager.wait_timeout(Duration::from_secs(5)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!manager.is_running());
    assert!(!manager.thread_status(self_loop));
    assert!(commands.is_empty());

    // Once close() has joined the self loop it no longer ticks.
    std::thread::sleep(Duration::from_millis(20));
    let frozen = *ticks.lock();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(*ticks.lock(), frozen);
}

#[test]
fn test_close_bounded_by_slow_body() {
    init_tracing();

    let manager = Manager::new();
    let buf = RingBuffer::<u32>::new(4);
    let producer_buf = buf.clone();
    manager
        .add_loop_thread(Duration::from_millis(10), move || {
            std::thread::sleep(Duration::from_millis(100));
            producer_buf.enqueue(1).unwrap();
        })
        .unwrap();

    std::thread::sleep(Duration::from_millis(30));
    let started = Instant::now();
    manager.close();

    // close() waits for the in-flight body but never for more than one.
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(buf.len() >= 1);
}
